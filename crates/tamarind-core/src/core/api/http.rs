use super::types::{
    BatchSubmission, FileQuery, JobQuery, JobRecord, JobSubmission, JobsPage,
};
use super::{ApiError, ClientConfig, TamarindApi};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "x-api-key";

/// Blocking HTTP implementation of [`TamarindApi`].
///
/// Two clients are kept: one for the API itself, which never goes through a proxy, and one
/// for result archive downloads, which uses the proxies resolved into [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    config: ClientConfig,
    api: Client,
    downloads: Client,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut key = HeaderValue::from_str(&config.api_key).map_err(|_| ApiError::InvalidApiKey)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let api = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .no_proxy()
            .build()?;

        let mut downloads = Client::builder().timeout(config.timeout).no_proxy();
        if let Some(proxy) = &config.proxy.http {
            downloads = downloads.proxy(reqwest::Proxy::http(proxy)?);
        }
        if let Some(proxy) = &config.proxy.https {
            downloads = downloads.proxy(reqwest::Proxy::https(proxy)?);
        }
        let downloads = downloads.build()?;

        debug!(base_url = %config.base_url, proxied = !config.proxy.is_empty(), "HTTP client ready");
        Ok(Self {
            config,
            api,
            downloads,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        self.config.endpoint(endpoint)
    }

    fn send_text(request: RequestBuilder) -> Result<String, ApiError> {
        let response = check_status(request.send()?)?;
        let text = response.text()?;
        debug!("Response: {}", text);
        Ok(text)
    }

    fn paginate(&self, mut params: Vec<(&'static str, String)>) -> Result<Vec<JobRecord>, ApiError> {
        let mut out = Vec::new();
        loop {
            let response = self.api.get(self.url("jobs")).query(&params).send()?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                debug!("Job listing stopped at HTTP {}: {}", status, body);
                break;
            }
            let value: Value = response.json()?;
            debug!("Job listing page: {}", value);
            let page = JobsPage::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
            out.extend(page.jobs);

            let Some(start_key) = page.start_key else {
                break;
            };
            params.retain(|(k, _)| *k != "startKey");
            params.push(("startKey", start_key));
        }
        Ok(out)
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    debug!("HTTP {} body: {}", status, body);
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

impl TamarindApi for HttpClient {
    fn submit_job(&self, request: &JobSubmission) -> Result<String, ApiError> {
        Self::send_text(self.api.post(self.url("submit-job")).json(request))
    }

    fn submit_batch(&self, request: &BatchSubmission) -> Result<String, ApiError> {
        Self::send_text(self.api.post(self.url("submit-batch")).json(request))
    }

    fn upload_file(
        &self,
        local_path: &Path,
        remote_name: &str,
        folder: Option<&str>,
    ) -> Result<(), ApiError> {
        let bytes = fs::read(local_path)?;
        let mut request = self
            .api
            .put(self.url(&format!("upload/{}", remote_name)))
            .body(bytes);
        if let Some(folder) = folder {
            request = request.query(&[("folder", folder)]);
        }
        Self::send_text(request).map(|_| ())
    }

    fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobRecord>, ApiError> {
        let mut params = Vec::new();
        if let Some(name) = &query.job_name {
            params.push(("jobName", name.clone()));
        }
        if query.organization {
            params.push(("organization", "true".to_string()));
        }
        if query.include_subjobs {
            params.push(("includeSubjobs", "true".to_string()));
        }
        self.paginate(params)
    }

    fn list_batch_jobs(&self, batch_name: &str) -> Result<Vec<JobRecord>, ApiError> {
        let jobs = self.paginate(vec![("batch", batch_name.to_string())])?;
        if jobs.is_empty() {
            warn!("No job found under batch {}", batch_name);
        }
        Ok(jobs)
    }

    fn delete_job(&self, job_name: &str) -> Result<String, ApiError> {
        Self::send_text(
            self.api
                .post(self.url("delete-job"))
                .json(&json!({ "jobName": job_name })),
        )
    }

    fn result_url(&self, job_name: &str) -> Result<String, ApiError> {
        let text = Self::send_text(
            self.api
                .post(self.url("result"))
                .json(&json!({ "jobName": job_name })),
        )?;
        Ok(text.trim().replace('"', ""))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = check_status(self.downloads.get(url).send()?)?;
        Ok(response.bytes()?.to_vec())
    }

    fn list_files(&self, query: &FileQuery) -> Result<Vec<String>, ApiError> {
        let mut request = self.api.get(self.url("files"));
        if let Some(folder) = &query.folder {
            request = request.query(&[("folder", folder.as_str())]);
        }
        if query.include_folders {
            request = request.query(&[("includeFolders", "true")]);
        }
        let text = Self::send_text(request)?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn delete_file(&self, file_path: &str) -> Result<(), ApiError> {
        Self::send_text(
            self.api
                .get(self.url("delete-file"))
                .query(&[("filePath", file_path)]),
        )
        .map(|_| ())
    }

    fn delete_folder(&self, folder: &str) -> Result<(), ApiError> {
        Self::send_text(
            self.api
                .get(self.url("delete-file"))
                .query(&[("folder", folder)]),
        )
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    fn serve_once(response: String) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 8192];
                let n = stream.read(&mut buf).unwrap_or(0);
                let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{}/api/", addr), rx)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    fn client(base_url: &str) -> HttpClient {
        HttpClient::new(ClientConfig::new("secret-key").with_base_url(base_url)).unwrap()
    }

    #[test]
    fn result_url_strips_quotes_and_sends_api_key() {
        let (base, requests) = serve_once(http_response("200 OK", "\"https://bucket/x.zip\""));
        let url = client(&base).result_url("job1").unwrap();
        assert_eq!(url, "https://bucket/x.zip");

        let request = requests.recv().unwrap();
        assert!(request.starts_with("POST /api/result"));
        assert!(request.to_lowercase().contains("x-api-key: secret-key"));
    }

    #[test]
    fn submit_job_reports_status_and_body() {
        let (base, _requests) = serve_once(http_response("400 Bad Request", "name taken"));
        let request = JobSubmission {
            job_name: "dup".into(),
            job_type: "alphafold".into(),
            settings: Default::default(),
        };
        let err = client(&base).submit_job(&request).unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "name taken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn list_jobs_returns_empty_on_error_status() {
        let (base, requests) = serve_once(http_response("403 Forbidden", "nope"));
        let jobs = client(&base).list_jobs(&JobQuery::named("abc")).unwrap();
        assert!(jobs.is_empty());
        let request = requests.recv().unwrap();
        assert!(request.starts_with("GET /api/jobs?jobName=abc"));
    }

    #[test]
    fn invalid_api_key_is_rejected() {
        let result = HttpClient::new(ClientConfig::new("bad\nkey"));
        assert!(matches!(result, Err(ApiError::InvalidApiKey)));
    }
}
