use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Fixed one-time password accepted by the reset and verify flows.
pub const MOCK_OTP: &str = "123456";

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const AGENT_EMAIL: &str = "suraj@brickbroker.in";
pub const AGENT_PASSWORD: &str = "agent123";

#[derive(Clone, Debug)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub verified: bool,
}

impl Account {
    fn profile(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "role": self.role,
            "profilePicture": self.profile_picture,
            "verified": self.verified,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub listing_type: String,
    pub status: String,
    pub price: f64,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub floors: u32,
    #[serde(default)]
    pub year_built: u32,
    #[serde(default)]
    pub area: f64,
    pub area_unit: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub accounts: HashMap<String, Account>,
    pub agents: HashMap<String, Agent>,
    pub properties: HashMap<String, Property>,
    /// token -> account id
    pub sessions: HashMap<String, String>,
}

impl Store {
    fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.email.eq_ignore_ascii_case(email))
    }

    fn caller(&self, headers: &HeaderMap) -> Option<&Account> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.accounts.get(self.sessions.get(token)?)
    }

    /// Seeded with an admin, one approved and one pending agent, and a few
    /// listings.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.insert_account("admin-1", "Site Admin", ADMIN_EMAIL, ADMIN_PASSWORD, "ADMIN");
        store.insert_account("agent-1", "Suraj Adhwariya", AGENT_EMAIL, AGENT_PASSWORD, "AGENT");
        store.insert_account("agent-2", "Priya Sharma", "priya@brickbroker.in", "priya123", "AGENT");

        for (id, name, email, status, rating, specialization) in [
            ("agent-1", "Suraj Adhwariya", AGENT_EMAIL, "APPROVED", 4.9, "Luxury Properties"),
            ("agent-2", "Priya Sharma", "priya@brickbroker.in", "PENDING", 4.8, "Residential Properties"),
        ] {
            store.agents.insert(
                id.to_string(),
                Agent {
                    id: id.to_string(),
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: String::new(),
                    experience: None,
                    specialization: Some(specialization.to_string()),
                    rating: Some(rating),
                    previous_company: None,
                    bio: None,
                    status: status.to_string(),
                    profile_picture: None,
                },
            );
        }

        for (id, title, city, kind, listing, status, price, bedrooms, featured) in [
            ("prop-1", "Sea View Apartment", "Mumbai", "APARTMENT", "Residential", "PUBLISHED", 12_500_000.0, 3, true),
            ("prop-2", "Garden Villa", "Pune", "VILLA", "Residential", "PUBLISHED", 32_000_000.0, 4, false),
            ("prop-3", "Studio Near IT Park", "Pune", "STUDIO", "Rental", "PUBLISHED", 25_000.0, 1, false),
            ("prop-4", "Office Floor", "Bengaluru", "COMMERCIAL", "Commercial", "DRAFT", 54_000_000.0, 0, false),
        ] {
            store.properties.insert(
                id.to_string(),
                Property {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: String::new(),
                    city: city.to_string(),
                    state: String::new(),
                    address: String::new(),
                    pincode: String::new(),
                    property_type: kind.to_string(),
                    listing_type: listing.to_string(),
                    status: status.to_string(),
                    price,
                    bedrooms,
                    bathrooms: bedrooms.max(1),
                    floors: 1,
                    year_built: 2018,
                    area: 1200.0,
                    area_unit: "sqft".to_string(),
                    featured,
                    images: Vec::new(),
                },
            );
        }
        store
    }

    fn insert_account(&mut self, id: &str, name: &str, email: &str, password: &str, role: &str) {
        self.accounts.insert(
            id.to_string(),
            Account {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                phone: String::new(),
                role: role.to_string(),
                profile_picture: None,
                verified: true,
            },
        );
    }
}

pub type Db = Arc<RwLock<Store>>;

type Rejection = (StatusCode, Json<Value>);

fn reject(status: StatusCode, message: &str) -> Rejection {
    (status, Json(json!({ "message": message })))
}

fn unauthorized() -> Rejection {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })))
}

fn require_admin(store: &Store, headers: &HeaderMap) -> Result<(), Rejection> {
    match store.caller(headers) {
        Some(account) if account.role == "ADMIN" => Ok(()),
        Some(_) => Err(reject(StatusCode::FORBIDDEN, "Admin access required")),
        None => Err(unauthorized()),
    }
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(profile))
        .route("/profile/register-user", post(register_user))
        .route("/profile/register-agent", post(register_agent))
        .route("/send-reset-otp", post(send_reset_otp))
        .route("/reset-password", post(reset_password))
        .route("/send-otp", post(send_otp))
        .route("/verify-otp", post(verify_otp))
        .route("/is-authenticated", get(is_authenticated))
        .route("/api/properties", post(create_property))
        .route("/api/properties/all", get(list_properties))
        .route("/api/properties/search", get(search_properties))
        .route(
            "/api/properties/{id}",
            get(get_property).put(update_property).delete(delete_property),
        )
        .route("/api/properties/{id}/status", put(update_status))
        .route("/api/properties/{id}/featured", put(update_featured))
        .route("/admin/pending-agents", get(pending_agents))
        .route("/admin/agents", get(all_agents))
        .route("/admin/approve-agent/{id}", put(approve_agent))
        .route("/admin/reject-agent/{id}", put(reject_agent))
        .route("/admin/delete-agent/{id}", delete(delete_agent))
        .route("/admin/metrics/counts", get(metrics_counts))
        .route("/admin/metrics/properties-by-month", get(properties_by_month))
        .route("/admin/metrics/properties-by-city", get(properties_by_city))
        .route("/admin/metrics/properties-by-type", get(properties_by_type))
        .route("/admin/metrics/top-agents", get(top_agents))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> &'static str {
    "OK"
}

// --- auth ---

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<Value>, Rejection> {
    let mut store = db.write().await;
    let account = store
        .account_by_email(&input.email)
        .filter(|a| a.password == input.password)
        .cloned()
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;
    if account.role == "AGENT"
        && store.agents.get(&account.id).is_some_and(|a| a.status != "APPROVED")
    {
        return Err(reject(StatusCode::FORBIDDEN, "Agent account awaiting approval"));
    }

    let token = format!("tok-{}", Uuid::new_v4());
    store.sessions.insert(token.clone(), account.id.clone());
    tracing::info!(email = %account.email, role = %account.role, "login");
    Ok(Json(json!({
        "token": token,
        "user": {
            "id": account.id,
            "email": account.email,
            "name": account.name,
            "role": account.role,
        }
    })))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> &'static str {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = token {
        db.write().await.sessions.remove(token);
    }
    "Logged out successfully"
}

async fn profile(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, Rejection> {
    let store = db.read().await;
    let account = store.caller(&headers).ok_or_else(unauthorized)?;
    Ok(Json(account.profile()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: String,
    pub experience: Option<String>,
    pub specialization: Option<String>,
    pub previous_company: Option<String>,
    pub bio: Option<String>,
}

/// Reads the `user` JSON field and optional `profilePicture` file.
async fn read_registration(
    mut multipart: Multipart,
) -> Result<(Registration, Option<String>), Rejection> {
    let mut user = None;
    let mut picture = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| reject(StatusCode::BAD_REQUEST, "Malformed multipart body"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| reject(StatusCode::BAD_REQUEST, "Unreadable user field"))?;
                let parsed: Registration = serde_json::from_str(&text)
                    .map_err(|_| reject(StatusCode::BAD_REQUEST, "Invalid user payload"))?;
                user = Some(parsed);
            }
            "profilePicture" => {
                picture = Some(format!(
                    "/uploads/{}",
                    field.file_name().unwrap_or("profile")
                ));
            }
            _ => {}
        }
    }
    let user = user.ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Missing user field"))?;
    Ok((user, picture))
}

async fn register(
    db: &Db,
    input: Registration,
    picture: Option<String>,
    role: &str,
) -> Result<Account, Rejection> {
    let mut store = db.write().await;
    if store.account_by_email(&input.email).is_some() {
        return Err(reject(StatusCode::CONFLICT, "Email already registered"));
    }
    let account = Account {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        email: input.email,
        password: input.password,
        phone: input.phone,
        role: role.to_string(),
        profile_picture: picture,
        verified: false,
    };
    store.accounts.insert(account.id.clone(), account.clone());
    if role == "AGENT" {
        store.agents.insert(
            account.id.clone(),
            Agent {
                id: account.id.clone(),
                name: account.name.clone(),
                email: account.email.clone(),
                phone: account.phone.clone(),
                experience: input.experience,
                specialization: input.specialization,
                rating: None,
                previous_company: input.previous_company,
                bio: input.bio,
                status: "PENDING".to_string(),
                profile_picture: account.profile_picture.clone(),
            },
        );
    }
    tracing::info!(email = %account.email, role, "registered");
    Ok(account)
}

async fn register_user(
    State(db): State<Db>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    let (input, picture) = read_registration(multipart).await?;
    let account = register(&db, input, picture, "USER").await?;
    Ok((StatusCode::CREATED, Json(account.profile())))
}

async fn register_agent(
    State(db): State<Db>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    let (input, picture) = read_registration(multipart).await?;
    let account = register(&db, input, picture, "AGENT").await?;
    Ok((StatusCode::CREATED, Json(account.profile())))
}

#[derive(Deserialize)]
pub struct ResetOtpForm {
    pub email: String,
}

async fn send_reset_otp(
    State(db): State<Db>,
    Form(input): Form<ResetOtpForm>,
) -> Result<&'static str, Rejection> {
    let store = db.read().await;
    store
        .account_by_email(&input.email)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;
    Ok("OTP sent to your email")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPassword {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

async fn reset_password(
    State(db): State<Db>,
    Json(input): Json<ResetPassword>,
) -> Result<&'static str, Rejection> {
    if input.otp != MOCK_OTP {
        return Err(reject(StatusCode::BAD_REQUEST, "Invalid OTP"));
    }
    let mut store = db.write().await;
    let id = store
        .account_by_email(&input.email)
        .map(|a| a.id.clone())
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;
    if let Some(account) = store.accounts.get_mut(&id) {
        account.password = input.new_password;
    }
    Ok("Password reset successfully")
}

async fn send_otp(State(db): State<Db>, headers: HeaderMap) -> Result<&'static str, Rejection> {
    let store = db.read().await;
    store.caller(&headers).ok_or_else(unauthorized)?;
    Ok("Verification OTP sent")
}

#[derive(Deserialize)]
pub struct VerifyOtp {
    pub otp: String,
}

async fn verify_otp(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<VerifyOtp>,
) -> Result<Json<Value>, Rejection> {
    let mut store = db.write().await;
    let id = store.caller(&headers).ok_or_else(unauthorized)?.id.clone();
    if input.otp != MOCK_OTP {
        return Err(reject(StatusCode::BAD_REQUEST, "Invalid OTP"));
    }
    if let Some(account) = store.accounts.get_mut(&id) {
        account.verified = true;
    }
    Ok(Json(json!({ "message": "Account verified" })))
}

async fn is_authenticated(State(db): State<Db>, headers: HeaderMap) -> Json<bool> {
    Json(db.read().await.caller(&headers).is_some())
}

// --- properties ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub status: Option<String>,
    pub listing_type: Option<String>,
    pub featured: Option<bool>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl SearchQuery {
    fn matches(&self, p: &Property) -> bool {
        let eq = |want: &Option<String>, have: &str| {
            want.as_deref().is_none_or(|w| w.eq_ignore_ascii_case(have))
        };
        eq(&self.city, &p.city)
            && eq(&self.state, &p.state)
            && eq(&self.property_type, &p.property_type)
            && eq(&self.status, &p.status)
            && eq(&self.listing_type, &p.listing_type)
            && self.min_price.is_none_or(|min| p.price >= min)
            && self.max_price.is_none_or(|max| p.price <= max)
            && self.bedrooms.is_none_or(|n| p.bedrooms >= n)
            && self.bathrooms.is_none_or(|n| p.bathrooms >= n)
            && self.featured.is_none_or(|f| p.featured == f)
    }
}

fn sorted(store: &Store) -> Vec<Property> {
    let mut all: Vec<Property> = store.properties.values().cloned().collect();
    all.sort_by(|a, b| a.id.cmp(&b.id));
    all
}

async fn list_properties(State(db): State<Db>) -> Json<Vec<Property>> {
    Json(sorted(&*db.read().await))
}

async fn search_properties(
    State(db): State<Db>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Property>> {
    let matched = sorted(&*db.read().await)
        .into_iter()
        .filter(|p| query.matches(p));
    let page: Vec<Property> = match query.limit {
        Some(limit) => {
            let skip = query.page.unwrap_or(1).saturating_sub(1) * limit;
            matched.skip(skip).take(limit).collect()
        }
        None => matched.collect(),
    };
    Json(page)
}

async fn get_property(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Property>, Rejection> {
    db.read()
        .await
        .properties
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Property not found"))
}

/// Reads the `property` JSON field and the names of any `file` parts.
async fn read_listing(mut multipart: Multipart) -> Result<(Value, Vec<String>), Rejection> {
    let mut property = None;
    let mut images = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| reject(StatusCode::BAD_REQUEST, "Malformed multipart body"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "property" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| reject(StatusCode::BAD_REQUEST, "Unreadable property field"))?;
                property = Some(
                    serde_json::from_str::<Value>(&text)
                        .map_err(|_| reject(StatusCode::BAD_REQUEST, "Invalid property payload"))?,
                );
            }
            "file" => images.push(format!("/uploads/{}", field.file_name().unwrap_or("image"))),
            _ => {}
        }
    }
    let property =
        property.ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Missing property field"))?;
    Ok((property, images))
}

fn require_lister(store: &Store, headers: &HeaderMap) -> Result<(), Rejection> {
    match store.caller(headers) {
        Some(a) if a.role == "ADMIN" || a.role == "AGENT" => Ok(()),
        Some(_) => Err(reject(StatusCode::FORBIDDEN, "Only agents can manage listings")),
        None => Err(unauthorized()),
    }
}

async fn create_property(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Property>), Rejection> {
    require_lister(&*db.read().await, &headers)?;
    let (mut input, images) = read_listing(multipart).await?;
    let id = Uuid::new_v4().to_string();
    if let Some(obj) = input.as_object_mut() {
        obj.insert("id".to_string(), json!(id));
        obj.insert("images".to_string(), json!(images));
    }
    let property: Property = serde_json::from_value(input)
        .map_err(|e| reject(StatusCode::BAD_REQUEST, &format!("Invalid property: {e}")))?;
    db.write().await.properties.insert(id, property.clone());
    Ok((StatusCode::CREATED, Json(property)))
}

/// Overlay the supplied JSON fields onto the stored property.
fn patch(property: &Property, changes: Value) -> Result<Property, Rejection> {
    let mut current = serde_json::to_value(property)
        .map_err(|_| reject(StatusCode::INTERNAL_SERVER_ERROR, "Corrupt property"))?;
    if let (Some(target), Value::Object(changes)) = (current.as_object_mut(), changes) {
        for (key, value) in changes {
            if key != "id" {
                target.insert(key, value);
            }
        }
    }
    serde_json::from_value(current)
        .map_err(|e| reject(StatusCode::BAD_REQUEST, &format!("Invalid property: {e}")))
}

async fn update_property(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Property>, Rejection> {
    require_lister(&*db.read().await, &headers)?;
    let (changes, images) = read_listing(multipart).await?;
    let mut store = db.write().await;
    let existing = store
        .properties
        .get(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Property not found"))?;
    let mut updated = patch(existing, changes)?;
    updated.images.extend(images);
    store.properties.insert(id, updated.clone());
    Ok(Json(updated))
}

async fn delete_property(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    require_lister(&store, &headers)?;
    store
        .properties
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Property not found"))
}

async fn update_status(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Property>, Rejection> {
    apply_json_patch(&db, &headers, &id, input, "status").await
}

async fn update_featured(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Property>, Rejection> {
    apply_json_patch(&db, &headers, &id, input, "featured").await
}

async fn apply_json_patch(
    db: &Db,
    headers: &HeaderMap,
    id: &str,
    input: Value,
    field: &str,
) -> Result<Json<Property>, Rejection> {
    let mut store = db.write().await;
    require_lister(&store, headers)?;
    let value = input
        .get(field)
        .cloned()
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, &format!("Missing {field}")))?;
    let existing = store
        .properties
        .get(id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Property not found"))?;
    let updated = patch(existing, json!({ field: value }))?;
    store.properties.insert(id.to_string(), updated.clone());
    Ok(Json(updated))
}

// --- admin ---

fn agents_where(store: &Store, keep: impl Fn(&Agent) -> bool) -> Vec<Agent> {
    let mut agents: Vec<Agent> = store.agents.values().filter(|a| keep(a)).cloned().collect();
    agents.sort_by(|a, b| a.id.cmp(&b.id));
    agents
}

async fn pending_agents(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Agent>>, Rejection> {
    let store = db.read().await;
    require_admin(&store, &headers)?;
    Ok(Json(agents_where(&store, |a| a.status == "PENDING")))
}

async fn all_agents(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Agent>>, Rejection> {
    let store = db.read().await;
    require_admin(&store, &headers)?;
    Ok(Json(agents_where(&store, |_| true)))
}

async fn set_agent_status(
    db: &Db,
    headers: &HeaderMap,
    id: &str,
    status: &str,
) -> Result<Json<Agent>, Rejection> {
    let mut store = db.write().await;
    require_admin(&store, headers)?;
    let agent = store
        .agents
        .get_mut(id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Agent not found"))?;
    agent.status = status.to_string();
    tracing::info!(agent = %id, status, "agent status changed");
    Ok(Json(agent.clone()))
}

async fn approve_agent(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Agent>, Rejection> {
    set_agent_status(&db, &headers, &id, "APPROVED").await
}

async fn reject_agent(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Agent>, Rejection> {
    set_agent_status(&db, &headers, &id, "REJECTED").await
}

async fn delete_agent(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, Rejection> {
    let mut store = db.write().await;
    require_admin(&store, &headers)?;
    store
        .agents
        .remove(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Agent not found"))?;
    store.accounts.remove(&id);
    Ok(Json(json!({ "message": "Agent deleted" })))
}

async fn metrics_counts(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    let store = db.read().await;
    require_admin(&store, &headers)?;
    let count_props = |status: &str| store.properties.values().filter(|p| p.status == status).count();
    Ok(Json(json!({
        "totalProperties": store.properties.len(),
        "totalAgents": store.agents.len(),
        "totalUsers": store.accounts.values().filter(|a| a.role == "USER").count(),
        "pendingAgents": store.agents.values().filter(|a| a.status == "PENDING").count(),
        "publishedProperties": count_props("PUBLISHED"),
        "soldProperties": count_props("SOLD"),
        "monthlyRevenue": 1_250_000.0,
        "websiteVisitors": 18_000,
    })))
}

async fn properties_by_month(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    require_admin(&*db.read().await, &headers)?;
    Ok(Json(json!([
        { "month": "Jan", "count": 4 },
        { "month": "Feb", "count": 6 },
        { "month": "Mar", "count": 9 },
    ])))
}

/// Group property counts by a field, sorted by key.
fn grouped(store: &Store, key_name: &str, key: impl Fn(&Property) -> String) -> Value {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for p in store.properties.values() {
        *counts.entry(key(p)).or_default() += 1;
    }
    let mut rows: Vec<(String, u64)> = counts.into_iter().collect();
    rows.sort();
    Value::Array(
        rows.into_iter()
            .map(|(k, count)| json!({ key_name: k, "count": count }))
            .collect(),
    )
}

async fn properties_by_city(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    let store = db.read().await;
    require_admin(&store, &headers)?;
    Ok(Json(grouped(&store, "city", |p| p.city.clone())))
}

async fn properties_by_type(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    let store = db.read().await;
    require_admin(&store, &headers)?;
    Ok(Json(grouped(&store, "type", |p| p.property_type.clone())))
}

async fn top_agents(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    let store = db.read().await;
    require_admin(&store, &headers)?;
    let rows: Vec<Value> = agents_where(&store, |a| a.status == "APPROVED")
        .into_iter()
        .map(|a| {
            json!({
                "id": a.id,
                "name": a.name,
                "email": a.email,
                "propertiesSold": 0,
                "totalRevenue": 0.0,
                "rating": a.rating.unwrap_or(0.0),
            })
        })
        .collect();
    Ok(Json(Value::Array(rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property() -> Property {
        Store::seeded().properties["prop-2"].clone()
    }

    #[test]
    fn property_serializes_type_field() {
        let json = serde_json::to_value(property()).unwrap();
        assert_eq!(json["type"], "VILLA");
        assert_eq!(json["listingType"], "Residential");
        assert!(json.get("propertyType").is_none());
    }

    #[test]
    fn search_query_filters_case_insensitively() {
        let query = SearchQuery {
            city: Some("pune".to_string()),
            bedrooms: Some(4),
            ..Default::default()
        };
        assert!(query.matches(&property()));

        let query = SearchQuery {
            featured: Some(true),
            ..Default::default()
        };
        assert!(!query.matches(&property()));
    }

    #[test]
    fn patch_overlays_fields_but_keeps_id() {
        let updated = patch(&property(), json!({"id": "other", "status": "SOLD", "price": 1.0})).unwrap();
        assert_eq!(updated.id, "prop-2");
        assert_eq!(updated.status, "SOLD");
        assert_eq!(updated.price, 1.0);
    }

    #[test]
    fn patch_rejects_wrong_types() {
        let err = patch(&property(), json!({"bedrooms": "many"})).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn seeded_store_has_one_pending_agent() {
        let store = Store::seeded();
        assert_eq!(agents_where(&store, |a| a.status == "PENDING").len(), 1);
        assert!(store.account_by_email("ADMIN@example.com").is_some());
    }
}
