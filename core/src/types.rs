//! Domain DTOs exchanged with the BrickBroker backend.
//!
//! # Design
//! These shapes are a contract with the backend; the client only moves them
//! through JSON. Optional and timestamp fields default when absent so a
//! sparse payload still decodes.

use serde::{Deserialize, Serialize};

/// Account role as the backend spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Agent,
    User,
}

impl Role {
    /// Lower-case form stored in the session.
    pub fn session_value(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity returned alongside a login token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AuthenticatedUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAgentRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

// Enums received from the backend carry an `Unknown` catch-all so a value
// added server-side does not fail decoding of the whole record.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    Apartment,
    Villa,
    Studio,
    Penthouse,
    Townhouse,
    Commercial,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingType {
    Residential,
    Commercial,
    Rental,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ListingType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingType::Residential => "Residential",
            ListingType::Commercial => "Commercial",
            ListingType::Rental => "Rental",
            ListingType::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyStatus {
    Published,
    Pending,
    Draft,
    Sold,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PropertyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyStatus::Published => "PUBLISHED",
            PropertyStatus::Pending => "PENDING",
            PropertyStatus::Draft => "DRAFT",
            PropertyStatus::Sold => "SOLD",
            PropertyStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    Sqft,
    Sqm,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Listing agent summary embedded in a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAgent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub listing_type: ListingType,
    #[serde(default)]
    pub status: PropertyStatus,
    #[serde(default)]
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
    #[serde(default)]
    pub area_unit: AreaUnit,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<PropertyAgent>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Payload for creating a property listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPropertyRequest {
    pub title: String,
    pub description: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub pincode: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub status: PropertyStatus,
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub floors: u32,
    pub year_built: u32,
    pub area: f64,
    pub area_unit: AreaUnit,
    pub featured: bool,
}

/// Partial update of a property listing; absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PropertyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floors: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_unit: Option<AreaUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

/// Filters for `/api/properties/search`. Unset and empty fields are left
/// out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertySearchParams {
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
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PropertySearchParams {
    /// Query pairs in declaration order, using the backend's parameter names.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let fields = [
            ("city", self.city.clone()),
            ("state", self.state.clone()),
            ("type", self.property_type.clone()),
            ("minPrice", self.min_price.map(|v| v.to_string())),
            ("maxPrice", self.max_price.map(|v| v.to_string())),
            ("bedrooms", self.bedrooms.map(|v| v.to_string())),
            ("bathrooms", self.bathrooms.map(|v| v.to_string())),
            ("status", self.status.clone()),
            ("listingType", self.listing_type.clone()),
            ("featured", self.featured.map(|v| v.to_string())),
            ("page", self.page.map(|v| v.to_string())),
            ("limit", self.limit.map(|v| v.to_string())),
        ];
        fields
            .into_iter()
            .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentStatus {
    Pending,
    Approved,
    Rejected,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_record: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMetrics {
    pub total_properties: u64,
    pub total_agents: u64,
    pub total_users: u64,
    pub pending_agents: u64,
    pub published_properties: u64,
    pub sold_properties: u64,
    pub monthly_revenue: f64,
    pub website_visitors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyByMonth {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyByCity {
    pub city: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyByType {
    #[serde(rename = "type")]
    pub property_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAgent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub properties_sold: u64,
    pub total_revenue: f64,
    pub rating: f64,
}

/// Combined payload for the admin dashboard landing view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub metrics: AdminMetrics,
    pub recent_properties: Vec<serde_json::Value>,
    pub pending_agents: Vec<Agent>,
    pub recent_activity: Vec<serde_json::Value>,
}

/// Identity read back from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_params_drop_unset_and_empty_fields() {
        let params = PropertySearchParams {
            city: Some("Pune".to_string()),
            state: Some(String::new()),
            bedrooms: None,
            featured: Some(false),
            ..Default::default()
        };
        assert_eq!(
            params.to_pairs(),
            vec![("city", "Pune".to_string()), ("featured", "false".to_string())]
        );
    }

    #[test]
    fn search_params_render_numbers_plainly() {
        let params = PropertySearchParams {
            min_price: Some(2_500_000.0),
            max_price: Some(7_500_000.5),
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(
            params.to_pairs(),
            vec![
                ("minPrice", "2500000".to_string()),
                ("maxPrice", "7500000.5".to_string()),
                ("page", "2".to_string()),
            ]
        );
    }

    #[test]
    fn property_decodes_backend_shape() {
        let json = r#"{
            "id": "p1", "title": "Sea View", "city": "Mumbai",
            "type": "APARTMENT", "listingType": "Residential", "status": "PUBLISHED",
            "price": 12500000, "bedrooms": 3, "areaUnit": "sqft", "featured": true
        }"#;
        let property: Property = serde_json::from_str(json).unwrap();
        assert_eq!(property.property_type, PropertyType::Apartment);
        assert_eq!(property.listing_type, ListingType::Residential);
        assert!(property.featured);
        assert!(property.images.is_empty());
        assert!(property.agent.is_none());
    }

    #[test]
    fn unfamiliar_enum_values_decode_as_unknown() {
        let json = r#"{
            "id": "p2", "title": "Farm Plot", "city": "Nashik",
            "type": "PLOT", "listingType": "Agricultural", "status": "ARCHIVED",
            "price": 4000000, "areaUnit": "acre"
        }"#;
        let property: Property = serde_json::from_str(json).unwrap();
        assert_eq!(property.property_type, PropertyType::Unknown);
        assert_eq!(property.listing_type, ListingType::Unknown);
        assert_eq!(property.status, PropertyStatus::Unknown);
        assert_eq!(property.area_unit, AreaUnit::Unknown);

        let agent: Agent = serde_json::from_str(r#"{"id":"a1","status":"SUSPENDED"}"#).unwrap();
        assert_eq!(agent.status, AgentStatus::Unknown);
        assert!(agent.name.is_empty());
    }

    #[test]
    fn sparse_property_keeps_its_id() {
        let property: Property = serde_json::from_str(r#"{"id":"p3"}"#).unwrap();
        assert_eq!(property.id, "p3");
        assert_eq!(property.price, 0.0);
        assert_eq!(property.status, PropertyStatus::Unknown);
    }

    #[test]
    fn property_update_omits_absent_fields() {
        let update = PropertyUpdate {
            price: Some(9_000_000.0),
            status: Some(PropertyStatus::Sold),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"price": 9000000.0, "status": "SOLD"}));
    }

    #[test]
    fn role_uses_upper_case_wire_form() {
        let user: AuthenticatedUser =
            serde_json::from_str(r#"{"id":"1","email":"a@b.in","name":"A","role":"AGENT"}"#).unwrap();
        assert_eq!(user.role, Role::Agent);
        assert_eq!(user.role.session_value(), "agent");
    }
}
