//! HTTP 传输层
//!
//! `HttpTransport` 把"发一个请求、拿回状态码和响应体"抽象出来：
//! 浏览器里由 `gloo-net` 实现，测试里由 `MockTransport` 实现。
//! 信封解析、凭据附加等业务逻辑都在 `api` 模块，不在这里。

use crate::error::TransportError;
use dispatchboard_shared::protocol::HttpMethod;
use dispatchboard_shared::validation::FileMeta;
use futures::future::{Either, select};
use gloo_net::http::{Request, RequestBuilder};
use gloo_timers::future::TimeoutFuture;
use std::collections::HashMap;
use std::time::Duration;
use web_sys::{AbortController, Blob, BlobPropertyBag, FormData};

#[cfg(test)]
use futures::channel::oneshot;
#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::VecDeque;

// =========================================================
// 请求 / 响应结构
// =========================================================

/// 上传文件的内容来源
#[derive(Debug, Clone)]
pub enum FileContent {
    /// 用户在浏览器中选择的文件
    Browser(web_sys::File),
    /// 内存中的字节（测试或程序生成）
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub content: FileContent,
}

impl UploadFile {
    pub fn from_browser(file: web_sys::File) -> Self {
        Self {
            name: file.name(),
            mime: file.type_(),
            size: file.size() as u64,
            content: FileContent::Browser(file),
        }
    }

    pub fn from_bytes(name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime: mime.to_string(),
            size: bytes.len() as u64,
            content: FileContent::Bytes(bytes),
        }
    }

    pub fn meta(&self) -> FileMeta {
        FileMeta {
            name: self.name.clone(),
            mime: self.mime.clone(),
            size: self.size,
        }
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(String),
    Multipart { field: String, file: UploadFile },
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.query = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        self
    }

    pub fn with_json(mut self, body: String) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn with_file(mut self, field: &str, file: UploadFile) -> Self {
        self.body = Some(RequestBody::Multipart {
            field: field.to_string(),
            file,
        });
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP 传输特性
/// (?Send) 是因为浏览器中的 JsValue 等类型不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// =========================================================
// 实现层: 浏览器客户端 (gloo-net)
// =========================================================

#[derive(Debug, Clone, Copy)]
pub struct BrowserTransport {
    timeout: Duration,
}

impl BrowserTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn builder(req: &HttpRequest) -> RequestBuilder {
        let builder = match req.method {
            HttpMethod::Get => Request::get(&req.url),
            HttpMethod::Post => Request::post(&req.url),
            HttpMethod::Put => Request::put(&req.url),
            HttpMethod::Delete => Request::delete(&req.url),
        };
        let builder = req
            .headers
            .iter()
            .fold(builder, |b, (k, v)| b.header(k, v));
        if req.query.is_empty() {
            builder
        } else {
            builder.query(req.query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        }
    }

    fn form_data(field: &str, file: &UploadFile) -> Result<FormData, TransportError> {
        let form = FormData::new().map_err(|e| TransportError::Build(format!("{e:?}")))?;
        let appended = match &file.content {
            FileContent::Browser(f) => form.append_with_blob_and_filename(field, f, &file.name),
            FileContent::Bytes(bytes) => {
                let blob = bytes_to_blob(bytes, &file.mime)?;
                form.append_with_blob_and_filename(field, &blob, &file.name)
            }
        };
        appended.map_err(|e| TransportError::Build(format!("{e:?}")))?;
        Ok(form)
    }
}

fn bytes_to_blob(bytes: &[u8], mime: &str) -> Result<Blob, TransportError> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let props = BlobPropertyBag::new();
    props.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &props)
        .map_err(|e| TransportError::Build(format!("{e:?}")))
}

#[async_trait::async_trait(?Send)]
impl HttpTransport for BrowserTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let abort = AbortController::new().map_err(|e| TransportError::Build(format!("{e:?}")))?;
        let builder = Self::builder(&req).abort_signal(Some(&abort.signal()));

        // multipart 不设置 Content-Type，由浏览器补上 boundary
        let request = match &req.body {
            None => builder.build(),
            Some(RequestBody::Json(json)) => builder
                .header("Content-Type", "application/json")
                .body(json.clone()),
            Some(RequestBody::Multipart { field, file }) => {
                builder.body(Self::form_data(field, file)?)
            }
        }
        .map_err(|e| TransportError::Build(e.to_string()))?;

        let exchange = Box::pin(async move {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, gloo_net::Error>(HttpResponse { status, body })
        });
        let millis = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
        let timer = Box::pin(TimeoutFuture::new(millis));

        match select(exchange, timer).await {
            Either::Left((result, _)) => result.map_err(|e| TransportError::Network(e.to_string())),
            Either::Right(((), _)) => {
                abort.abort();
                Err(TransportError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}

// =========================================================
// 测试工具: MockTransport
// =========================================================

#[cfg(test)]
type RouteKey = (HttpMethod, String);

/// 按 (方法, URL) 返回预设响应，并记录发出的请求。
///
/// 同一路由的多个响应按顺序取出，最后一个会被重复使用。
/// `gate` 可以让某个请求挂起，直到测试手动放行，用来模拟乱序返回。
#[cfg(test)]
pub struct MockTransport {
    responses: RefCell<HashMap<RouteKey, VecDeque<(u16, String)>>>,
    gates: RefCell<HashMap<RouteKey, VecDeque<oneshot::Receiver<()>>>>,
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            gates: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.responses
            .borrow_mut()
            .entry((method, url.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
    }

    /// 下一个命中该路由的请求会挂起，直到返回的 Sender 被触发或丢弃
    pub fn gate(&self, method: HttpMethod, url: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .borrow_mut()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (req.method, req.url.clone());
        self.requests.borrow_mut().push(req);

        let canned = {
            let mut responses = self.responses.borrow_mut();
            responses.get_mut(&key).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };
        let gate = self
            .gates
            .borrow_mut()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let (status, body) = canned.unwrap_or((404, "Not Found".to_string()));
        Ok(HttpResponse { status, body })
    }
}
