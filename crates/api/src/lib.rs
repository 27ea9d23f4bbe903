pub mod gen {
    pub mod api {
        pub mod v1 {
            tonic::include_proto!("api.v1");
        }
    }
}
