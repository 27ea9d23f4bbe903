use axum::{response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};

pub struct GatewayMetrics {
    pub registry: Registry,
    pub clicks_total: IntCounter,
    pub clicks_failed_total: IntCounter,
    pub camera_fallbacks_total: IntCounter,
    pub segmentation_errors_total: IntCounter,
    pub last_click_seconds: Gauge,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("bev_gateway".into()), None).unwrap();

        macro_rules! reg {
            ($m:expr) => {{
                registry.register(Box::new($m.clone())).unwrap();
                $m
            }};
        }

        Self {
            clicks_total: reg!(IntCounter::with_opts(prometheus::Opts::new(
                "gateway_clicks_total",
                "Total click requests received"
            ))
            .unwrap()),
            clicks_failed_total: reg!(IntCounter::with_opts(prometheus::Opts::new(
                "gateway_clicks_failed_total",
                "Total click requests that returned an error"
            ))
            .unwrap()),
            camera_fallbacks_total: reg!(IntCounter::with_opts(prometheus::Opts::new(
                "gateway_camera_fallbacks_total",
                "Clicks resolved through the low-confidence front-camera fallback"
            ))
            .unwrap()),
            segmentation_errors_total: reg!(IntCounter::with_opts(prometheus::Opts::new(
                "gateway_segmentation_errors_total",
                "Segmentation collaborator failures and timeouts"
            ))
            .unwrap()),
            last_click_seconds: reg!(Gauge::with_opts(prometheus::Opts::new(
                "gateway_last_click_seconds",
                "Wall-clock duration of the most recent successful click"
            ))
            .unwrap()),
            registry,
        }
    }

    pub fn router(&self) -> Router {
        let reg = self.registry.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let reg = reg.clone();
                async move {
                    let mf = reg.gather();
                    let mut buf = Vec::new();
                    TextEncoder::new().encode(&mf, &mut buf).unwrap();
                    String::from_utf8(buf).unwrap().into_response()
                }
            }),
        )
    }
}
