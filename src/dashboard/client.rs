use tracing::info;

use crate::cluster::MemberTelemetry;

pub struct Client {
    client: reqwest::Client,
}

#[derive(Debug)]
pub enum Error {
    ErrorReachingMember(reqwest::Error),
    StatusCodeError(reqwest::StatusCode, String),
    ErrorDecodingResponse(String),
}

type Result<T> = std::result::Result<T, Error>;

impl Client {
    pub fn new() -> Self {
        Client {
            client: reqwest::Client::new(),
        }
    }

    pub async fn member_state(&self, addr: &str) -> Result<MemberTelemetry> {
        let url = format!("http://{}/state", addr);
        info!("Scraping member state from: {:?}", url);
        let res = self.client.get(&url).send().await;
        if res.is_err() {
            return Err(Error::ErrorReachingMember(res.err().unwrap()));
        }
        let res = res.unwrap();
        if !res.status().is_success() {
            let status = res.status();
            let err = res.text().await;
            let err_str = format!("{:?}", err);
            return Err(Error::StatusCodeError(status, err_str));
        }
        let state = res.json::<MemberTelemetry>().await;
        if state.is_err() {
            let err = state.err().unwrap();
            let err_str = format!("{:?}", err);
            return Err(Error::ErrorDecodingResponse(err_str));
        }
        Ok(state.unwrap())
    }
}

impl Default for Client {
    fn default() -> Self {
        Client::new()
    }
}
