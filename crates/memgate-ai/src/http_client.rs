use reqwest::Client;

/// Forces direct connections, bypassing any system proxy. Tests set this so
/// mock servers on localhost stay reachable.
const NO_PROXY_ENV: &str = "MEMGATE_DISABLE_SYSTEM_PROXY";

pub(crate) fn build_http_client() -> Client {
    let bypass_proxy = cfg!(test) || std::env::var_os(NO_PROXY_ENV).is_some();
    if !bypass_proxy {
        return Client::new();
    }
    Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build reqwest client")
}
