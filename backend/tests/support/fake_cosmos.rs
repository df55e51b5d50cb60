//! In-process stand-in for the Cosmos DB REST surface used by the order
//! repository.
//!
//! The fake serves one database and container, keeps documents per logical
//! partition, evaluates the equality queries the repository sends, pages
//! results through `x-ms-continuation`, and issues tokens from an
//! `oauth2/v2.0/token` endpoint. Requests without a valid authorization header
//! are answered with `401` so credential handling is exercised end to end.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, guard, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha256;
use url::Url;
use url::form_urlencoded;

pub const DATABASE: &str = "orderdb";
pub const CONTAINER: &str = "orders";
pub const ISSUED_TOKEN: &str = "fake-aad-token";

/// Credential the fake accepts.
#[derive(Debug, Clone)]
pub enum AcceptedCredential {
    /// Verify master-key signatures with this decoded key.
    SharedKey(Vec<u8>),
    /// Accept bearer tokens equal to [`ISSUED_TOKEN`].
    Token,
}

#[derive(Debug, Default)]
pub struct FakeState {
    documents: BTreeMap<(String, String), Value>,
    pub page_size: Option<usize>,
    pub partition_headers: Vec<String>,
    pub query_pages_served: usize,
    pub token_requests: Vec<BTreeMap<String, String>>,
    pub rejected_requests: usize,
}

impl FakeState {
    /// Store `document` directly, bypassing the REST surface.
    pub fn seed(&mut self, partition: &str, document: Value) {
        let id = document["id"].as_str().unwrap_or_default().to_owned();
        self.documents.insert((partition.to_owned(), id), document);
    }

    /// Documents held in one logical partition.
    pub fn partition(&self, partition: &str) -> Vec<&Value> {
        self.documents
            .iter()
            .filter(|((value, _), _)| value == partition)
            .map(|(_, document)| document)
            .collect()
    }
}

struct Shared {
    credential: AcceptedCredential,
    state: Mutex<FakeState>,
}

/// A running fake account. Stops the server when dropped.
pub struct FakeCosmos {
    addr: SocketAddr,
    shared: Arc<Shared>,
    handle: ServerHandle,
}

impl FakeCosmos {
    /// Bind on an ephemeral port and start serving.
    ///
    /// Must be called from within an Actix system, e.g. `#[actix_rt::test]`.
    pub fn start(credential: AcceptedCredential) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            credential,
            state: Mutex::new(FakeState::default()),
        });
        let data = web::Data::from(shared.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/{tenant}/oauth2/v2.0/token", web::post().to(issue_token))
                .route("/dbs/{db}/colls/{coll}", web::get().to(read_container))
                .service(
                    web::resource("/dbs/{db}/colls/{coll}/docs")
                        .route(
                            web::post()
                                .guard(guard::Header("x-ms-documentdb-isquery", "True"))
                                .to(query_documents),
                        )
                        .route(web::post().to(create_document)),
                )
                .service(
                    web::resource("/dbs/{db}/colls/{coll}/docs/{id}")
                        .route(web::get().to(read_document))
                        .route(web::put().to(replace_document)),
                )
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))?;
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_rt::spawn(server);
        Ok(Self {
            addr,
            shared,
            handle,
        })
    }

    /// Account endpoint, e.g. `http://127.0.0.1:PORT/`.
    pub fn endpoint(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("fake endpoint")
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.shared.state.lock().expect("fake state lock")
    }
}

impl Drop for FakeCosmos {
    fn drop(&mut self) {
        drop(self.handle.stop(false));
    }
}

type SharedData = web::Data<Shared>;

#[derive(Deserialize)]
struct ContainerPath {
    db: String,
    coll: String,
}

#[derive(Deserialize)]
struct DocumentPath {
    db: String,
    coll: String,
    id: String,
}

#[derive(Deserialize)]
struct QueryBody {
    query: String,
    #[serde(default)]
    parameters: Vec<QueryParameter>,
}

#[derive(Deserialize)]
struct QueryParameter {
    name: String,
    value: Value,
}

fn error(status: StatusCode, code: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "code": code, "message": code }))
}

fn is_known(db: &str, coll: &str) -> bool {
    db == DATABASE && coll == CONTAINER
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

/// Check the authorization header against the accepted credential.
fn authorise(
    shared: &Shared,
    req: &HttpRequest,
    resource_type: &str,
    resource_link: &str,
) -> Result<(), HttpResponse> {
    let reject = || {
        shared.state.lock().expect("fake state lock").rejected_requests += 1;
        error(StatusCode::UNAUTHORIZED, "Unauthorized")
    };
    let Some(raw) = header(req, "authorization") else {
        return Err(reject());
    };
    let decoded: String = form_urlencoded::parse(raw.as_bytes())
        .map(|(key, _)| key.into_owned())
        .collect();
    let fields: BTreeMap<&str, &str> = decoded
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();

    let accepted = match &shared.credential {
        AcceptedCredential::Token => {
            fields.get("type") == Some(&"aad") && fields.get("sig") == Some(&ISSUED_TOKEN)
        }
        AcceptedCredential::SharedKey(key) => {
            let date = header(req, "x-ms-date").unwrap_or_default();
            let payload = format!(
                "{}\n{resource_type}\n{resource_link}\n{}\n\n",
                req.method().as_str().to_ascii_lowercase(),
                date.to_ascii_lowercase(),
            );
            let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("hmac key");
            mac.update(payload.as_bytes());
            let expected = STANDARD.encode(mac.finalize().into_bytes());
            fields.get("type") == Some(&"master") && fields.get("sig") == Some(&expected.as_str())
        }
    };
    if accepted && header(req, "x-ms-version").is_some() {
        Ok(())
    } else {
        Err(reject())
    }
}

/// Record and decode the partition header, rejecting requests without one.
fn partition_value(shared: &Shared, req: &HttpRequest) -> Result<String, HttpResponse> {
    let raw = header(req, "x-ms-documentdb-partitionkey").unwrap_or_default();
    shared
        .state
        .lock()
        .expect("fake state lock")
        .partition_headers
        .push(raw.to_owned());
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(values) if values.len() == 1 => Ok(values.into_iter().next().unwrap_or_default()),
        _ => Err(error(
            StatusCode::BAD_REQUEST,
            "PartitionKeyMissing",
        )),
    }
}

async fn issue_token(
    shared: SharedData,
    form: web::Form<BTreeMap<String, String>>,
) -> HttpResponse {
    shared
        .state
        .lock()
        .expect("fake state lock")
        .token_requests
        .push(form.into_inner());
    HttpResponse::Ok().json(json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "access_token": ISSUED_TOKEN,
    }))
}

async fn read_container(
    shared: SharedData,
    req: HttpRequest,
    path: web::Path<ContainerPath>,
) -> HttpResponse {
    let link = format!("dbs/{}/colls/{}", path.db, path.coll);
    if let Err(response) = authorise(&shared, &req, "colls", &link) {
        return response;
    }
    if !is_known(&path.db, &path.coll) {
        return error(StatusCode::NOT_FOUND, "NotFound");
    }
    HttpResponse::Ok().json(json!({ "id": path.coll }))
}

async fn create_document(
    shared: SharedData,
    req: HttpRequest,
    path: web::Path<ContainerPath>,
    body: web::Json<Value>,
) -> HttpResponse {
    let link = format!("dbs/{}/colls/{}", path.db, path.coll);
    if let Err(response) = authorise(&shared, &req, "docs", &link) {
        return response;
    }
    let partition = match partition_value(&shared, &req) {
        Ok(partition) => partition,
        Err(response) => return response,
    };
    let document = body.into_inner();
    let Some(id) = document["id"].as_str().map(str::to_owned) else {
        return error(StatusCode::BAD_REQUEST, "BadRequest");
    };
    let mut state = shared.state.lock().expect("fake state lock");
    let key = (partition, id);
    if state.documents.contains_key(&key) {
        return error(StatusCode::CONFLICT, "Conflict");
    }
    state.documents.insert(key, document.clone());
    HttpResponse::Created().json(document)
}

async fn query_documents(
    shared: SharedData,
    req: HttpRequest,
    path: web::Path<ContainerPath>,
    body: web::Bytes,
) -> HttpResponse {
    let link = format!("dbs/{}/colls/{}", path.db, path.coll);
    if let Err(response) = authorise(&shared, &req, "docs", &link) {
        return response;
    }
    if header(&req, "content-type") != Some("application/query+json") {
        return error(StatusCode::BAD_REQUEST, "BadRequest");
    }
    let partition = match partition_value(&shared, &req) {
        Ok(partition) => partition,
        Err(response) => return response,
    };
    let Ok(query) = serde_json::from_slice::<QueryBody>(&body) else {
        return error(StatusCode::BAD_REQUEST, "BadRequest");
    };
    let pinned = query
        .parameters
        .iter()
        .any(|p| p.name == "@partitionValue" && p.value == Value::from(partition.as_str()));
    if !query.query.contains("= @partitionValue") || !pinned {
        return error(StatusCode::BAD_REQUEST, "CrossPartitionQuery");
    }
    let filters: Vec<(&str, &Value)> = query
        .parameters
        .iter()
        .filter(|p| p.name != "@partitionValue")
        .map(|p| (p.name.trim_start_matches('@'), &p.value))
        .collect();

    let mut state = shared.state.lock().expect("fake state lock");
    let matching: Vec<Value> = state
        .partition(&partition)
        .into_iter()
        .filter(|document| filters.iter().all(|(field, value)| &document[*field] == *value))
        .cloned()
        .collect();

    let offset = header(&req, "x-ms-continuation")
        .and_then(|token| token.parse::<usize>().ok())
        .unwrap_or(0);
    let size = state.page_size.unwrap_or(usize::MAX);
    let page: Vec<Value> = matching.iter().skip(offset).take(size).cloned().collect();
    let next = offset.saturating_add(page.len());
    state.query_pages_served += 1;

    let mut response = HttpResponse::Ok();
    if next < matching.len() {
        response.insert_header(("x-ms-continuation", next.to_string()));
    }
    response.json(json!({ "_count": page.len(), "Documents": page }))
}

async fn read_document(
    shared: SharedData,
    req: HttpRequest,
    path: web::Path<DocumentPath>,
) -> HttpResponse {
    let link = format!("dbs/{}/colls/{}/docs/{}", path.db, path.coll, path.id);
    if let Err(response) = authorise(&shared, &req, "docs", &link) {
        return response;
    }
    let partition = match partition_value(&shared, &req) {
        Ok(partition) => partition,
        Err(response) => return response,
    };
    let state = shared.state.lock().expect("fake state lock");
    match state.documents.get(&(partition, path.id.clone())) {
        Some(document) => HttpResponse::Ok().json(document),
        None => error(StatusCode::NOT_FOUND, "NotFound"),
    }
}

async fn replace_document(
    shared: SharedData,
    req: HttpRequest,
    path: web::Path<DocumentPath>,
    body: web::Json<Value>,
) -> HttpResponse {
    let link = format!("dbs/{}/colls/{}/docs/{}", path.db, path.coll, path.id);
    if let Err(response) = authorise(&shared, &req, "docs", &link) {
        return response;
    }
    let partition = match partition_value(&shared, &req) {
        Ok(partition) => partition,
        Err(response) => return response,
    };
    let mut state = shared.state.lock().expect("fake state lock");
    let key = (partition, path.id.clone());
    if !state.documents.contains_key(&key) {
        return error(StatusCode::NOT_FOUND, "NotFound");
    }
    let document = body.into_inner();
    state.documents.insert(key, document.clone());
    HttpResponse::Ok().json(document)
}
