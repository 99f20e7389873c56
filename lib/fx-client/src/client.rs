use crate::{Error, Result, decode_image_data, request, response};
use indexmap::IndexMap;
use reqwest::{
    Response,
    multipart::{Form, Part},
};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Client {
    pub config: request::APIConfig,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: request::APIConfig) -> Client {
        Client {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url.trim_end_matches('/'))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs.max(1))
    }

    /// `GET /effects`, keeping the server's key order
    pub async fn effects(&self) -> Result<IndexMap<String, response::EffectInfo>> {
        let resp = self
            .http
            .get(self.url("/effects"))
            .timeout(self.timeout())
            .send()
            .await?;

        let body = check_status(resp).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn upload(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<response::UploadedImage> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(self.url("/upload"))
            .multipart(form)
            .timeout(self.timeout())
            .send()
            .await?;

        let body = check_status(resp).await?.text().await?;
        let uploaded: response::UploadedImage = serde_json::from_str(&body)?;
        log::debug!("uploaded {file_name} as {}", uploaded.id);

        Ok(uploaded)
    }

    pub async fn process_url(
        &self,
        image_url: &str,
        effects: &[request::EffectParams],
        preview: bool,
    ) -> Result<Vec<u8>> {
        let request_body = request::ProcessUrl {
            image_url,
            effects,
            preview,
        };

        let resp = self
            .http
            .post(self.url("/process-url"))
            .json(&request_body)
            .timeout(self.timeout())
            .send()
            .await?;

        processed_bytes(resp).await
    }

    pub async fn process_id(
        &self,
        image_id: &str,
        effects: &[request::EffectParams],
        preview: bool,
    ) -> Result<Vec<u8>> {
        let request_body = request::ProcessById {
            image_id,
            effects,
            preview,
        };

        let resp = self
            .http
            .post(self.url("/process"))
            .json(&request_body)
            .timeout(self.timeout())
            .send()
            .await?;

        processed_bytes(resp).await
    }

    /// `POST /process` as a form: `image` PNG blob plus `effects` JSON text
    pub async fn process_multipart(
        &self,
        png: Vec<u8>,
        effects: &[request::EffectParams],
        preview: bool,
    ) -> Result<Vec<u8>> {
        let image = Part::bytes(png)
            .file_name("image.png")
            .mime_str("image/png")?;

        let form = Form::new()
            .part("image", image)
            .text("effects", serde_json::to_string(effects)?)
            .text("preview", preview.to_string());

        let resp = self
            .http
            .post(self.url("/process"))
            .multipart(form)
            .timeout(self.timeout())
            .send()
            .await?;

        processed_bytes(resp).await
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<response::Error>(&body) {
        Ok(err) => err.error,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    log::warn!("backend responded {status}: {message}");

    Err(Error::Status {
        status: status.as_u16(),
        message,
    })
}

async fn processed_bytes(resp: Response) -> Result<Vec<u8>> {
    let body = check_status(resp).await?.text().await?;
    let processed: response::ProcessedImage = serde_json::from_str(&body)?;
    decode_image_data(&processed.image)
}
