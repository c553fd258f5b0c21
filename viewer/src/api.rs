use viewpointcore::model::{ErrorReply, GenerateBody, GenerateReply};

const DEFAULT_GATEWAY: &str = "http://127.0.0.1:9000";

pub fn gateway_url() -> String {
    std::env::var("VIEWPOINT_GATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY.into())
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("viewpoint-viewer/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub async fn post_generate(
    client: reqwest::Client,
    gateway: String,
    body: GenerateBody,
) -> Result<GenerateReply, String> {
    let response = client
        .post(format!("{}/api/generate", gateway.trim_end_matches('/')))
        .json(&body)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        response
            .json::<GenerateReply>()
            .await
            .map_err(|e| e.to_string())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorReply>(&text)
            .map(|reply| reply.error)
            .unwrap_or(text);
        Err(format!("{}: {}", status, message))
    }
}

pub async fn fetch_tile(client: reqwest::Client, url: String) -> Result<Vec<u8>, String> {
    let response = client.get(&url).send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("tile server responded with {}", response.status()));
    }
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| e.to_string())
}
