fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::env::var("OUT_DIR")
        .map_err(|e| format!("OUT_DIR environment variable not set: {}", e))?;

    // Supply a protoc binary if the environment doesn't provide one.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir(out_dir)
        .compile_protos(
            &["proto/v1/pipeline.proto"], // Files to compile
            &["proto"],                   // Include paths
        )?;

    println!("cargo:rerun-if-changed=proto/v1/pipeline.proto");

    Ok(())
}
