use crate::models::{
    AdminUser, CategoryStatus, ContactMessage, MessageStatus, TourStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use validator::Validate;

// DTOs define the wire contract. Responses carry the uniform envelope
// {success, data?, message?}; database models never reach clients directly.

// ============================================================================
// Generic envelope pieces
// ============================================================================

/// Generic `{success, message}` response for deletes and other acknowledgements.
#[derive(Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationDto {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl PaginationDto {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        PaginationDto {
            page,
            limit,
            total,
            total_pages: (total as f64 / limit as f64).ceil() as i64,
        }
    }
}

// ============================================================================
// Auth DTOs
// ============================================================================

/// Login request; `identifier` is a username or an email address.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginAdminDto {
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub identifier: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Admin user with the password hash stripped.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterAdminDto {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub role: String,
    pub status: String,
    #[serde(rename = "lastLogin")]
    pub last_login: Option<DateTime<Utc>>,
}

impl FilterAdminDto {
    pub fn filter_admin(admin: &AdminUser) -> Self {
        FilterAdminDto {
            id: admin.id.to_string(),
            username: admin.username.to_owned(),
            email: admin.email.to_owned(),
            full_name: admin.full_name.to_owned(),
            role: admin.role.to_str().to_string(),
            status: if admin.status == crate::models::AdminStatus::Active {
                "active".to_string()
            } else {
                "inactive".to_string()
            },
            last_login: admin.last_login,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub admin: FilterAdminDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponseDto {
    pub success: bool,
    pub data: LoginData,
}

// ============================================================================
// Tour DTOs
// ============================================================================

/// Create/update payload for a tour. The JSON bag fields are stored verbatim;
/// their shape belongs to the admin forms.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SaveTourDto {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub content: String,

    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    pub discount_price: Option<Decimal>,

    #[validate(range(min = 1, message = "Category is required"))]
    pub category_id: i64,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: Option<i32>,
    pub location: Option<String>,

    #[serde(default)]
    pub capacity: i32,
    #[serde(default)]
    pub available_spots: i32,

    pub hotel_makkah: Option<Value>,
    pub hotel_madinah: Option<Value>,
    #[serde(default = "empty_json_array")]
    pub contacts: Value,
    #[serde(default = "empty_json_array")]
    pub included_services: Value,
    #[serde(default = "empty_json_array")]
    pub excluded_services: Value,
    #[serde(default = "empty_json_array")]
    pub itinerary: Value,
    #[serde(default = "empty_json_array")]
    pub visit_places: Value,

    pub meta_title: Option<String>,
    pub meta_description: Option<String>,

    pub status: Option<TourStatus>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub priority: i32,
}

fn empty_json_array() -> Value {
    Value::Array(vec![])
}

fn validate_price(price: &Decimal) -> Result<(), validator::ValidationError> {
    if *price <= Decimal::ZERO {
        let mut err = validator::ValidationError::new("invalid_price");
        err.message = Some("Price must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

/// Tour row joined with its category name, as returned by every tour endpoint.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct TourDto {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub content: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub category_id: i64,
    pub category_name: String,
    pub featured_image: Option<String>,
    pub gallery: Value,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: Option<i32>,
    pub location: Option<String>,
    pub capacity: i32,
    pub available_spots: i32,
    pub hotel_makkah: Option<Value>,
    pub hotel_madinah: Option<Value>,
    pub contacts: Value,
    pub included_services: Value,
    pub excluded_services: Value,
    pub itinerary: Value,
    pub visit_places: Value,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub status: TourStatus,
    pub featured: bool,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TourQueryParams {
    #[validate(range(min = 1))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,

    pub status: Option<TourStatus>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PublicTourQueryParams {
    #[validate(range(min = 1))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,

    /// Category slug filter.
    pub category: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TourListData {
    pub items: Vec<TourDto>,
    pub pagination: PaginationDto,
}

#[derive(Debug, Serialize)]
pub struct TourListResponseDto {
    pub success: bool,
    pub data: TourListData,
}

#[derive(Debug, Serialize)]
pub struct TourResponseDto {
    pub success: bool,
    pub data: TourDto,
}

// ============================================================================
// Category DTOs
// ============================================================================

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SaveCategoryDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub sort_order: i32,

    pub status: Option<CategoryStatus>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryListData {
    pub items: Vec<crate::models::Category>,
    pub pagination: PaginationDto,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponseDto {
    pub success: bool,
    pub data: CategoryListData,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponseDto {
    pub success: bool,
    pub data: crate::models::Category,
}

/// Public category listing: active rows in sort order, no pagination.
#[derive(Debug, Serialize)]
pub struct PublicCategoriesResponseDto {
    pub success: bool,
    pub data: Vec<crate::models::Category>,
}

// ============================================================================
// Contact message DTOs
// ============================================================================

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct ContactFormDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    pub phone: Option<String>,
    pub subject: Option<String>,

    #[validate(length(
        min = 10,
        max = 2000,
        message = "Message must be between 10 and 2000 characters"
    ))]
    pub message: String,
}

/// Admin update: status transition and/or reply text. Both optional, both
/// idempotent when repeated.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMessageDto {
    pub status: Option<MessageStatus>,
    pub reply: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MessageQueryParams {
    #[validate(range(min = 1))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,

    pub status: Option<MessageStatus>,
}

#[derive(Debug, Serialize)]
pub struct ContactCreatedData {
    pub id: i64,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ContactCreatedResponseDto {
    pub success: bool,
    pub data: ContactCreatedData,
}

#[derive(Debug, Serialize)]
pub struct MessageListData {
    pub items: Vec<ContactMessage>,
    pub pagination: PaginationDto,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponseDto {
    pub success: bool,
    pub data: MessageListData,
}

#[derive(Debug, Serialize)]
pub struct MessageResponseDto {
    pub success: bool,
    pub data: ContactMessage,
}

// ============================================================================
// Settings DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsDto {
    pub settings: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponseDto {
    pub success: bool,
    pub data: HashMap<String, String>,
}

// ============================================================================
// Dashboard DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TourCounts {
    pub total: i64,
    pub active: i64,
    pub draft: i64,
    pub full: i64,
    pub inactive: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageCounts {
    pub total: i64,
    pub new: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub tours: TourCounts,
    pub categories: i64,
    pub messages: MessageCounts,
    pub recent_messages: Vec<ContactMessage>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponseDto {
    pub success: bool,
    pub data: DashboardData,
}

// ============================================================================
// Upload DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UploadData {
    pub thumb: String,
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponseDto {
    pub success: bool,
    pub data: UploadData,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn login_requires_identifier_and_password_length() {
        let ok = LoginAdminDto {
            identifier: "admin".to_string(),
            password: "123456".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty_identifier = LoginAdminDto {
            identifier: String::new(),
            password: "123456".to_string(),
        };
        assert!(empty_identifier.validate().is_err());

        let short_password = LoginAdminDto {
            identifier: "admin".to_string(),
            password: "12345".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn contact_message_length_bounds() {
        let mut dto = ContactFormDto {
            name: "Ali Veli".to_string(),
            email: "ali@example.com".to_string(),
            phone: None,
            subject: None,
            message: "Umre turu hakkında bilgi almak istiyorum.".to_string(),
        };
        assert!(dto.validate().is_ok());

        dto.message = "kısa".to_string(); // under 10 chars
        assert!(dto.validate().is_err());

        dto.message = "x".repeat(2000);
        assert!(dto.validate().is_ok());

        dto.message = "x".repeat(2001);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn contact_email_must_be_valid() {
        let dto = ContactFormDto {
            name: "Ali".to_string(),
            email: "not-an-email".to_string(),
            phone: None,
            subject: None,
            message: "Bilgi almak istiyorum lütfen.".to_string(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn tour_requires_title_positive_price_and_category() {
        let dto = SaveTourDto {
            title: "Umre Turu".to_string(),
            price: dec(1500),
            category_id: 1,
            ..Default::default()
        };
        assert!(dto.validate().is_ok());

        let no_title = SaveTourDto {
            price: dec(1500),
            category_id: 1,
            ..Default::default()
        };
        assert!(no_title.validate().is_err());

        let zero_price = SaveTourDto {
            title: "Umre Turu".to_string(),
            price: Decimal::ZERO,
            category_id: 1,
            ..Default::default()
        };
        assert!(zero_price.validate().is_err());

        let no_category = SaveTourDto {
            title: "Umre Turu".to_string(),
            price: dec(1500),
            category_id: 0,
            ..Default::default()
        };
        assert!(no_category.validate().is_err());
    }

    #[test]
    fn pagination_rounds_up() {
        let p = PaginationDto::new(1, 10, 25);
        assert_eq!(p.total_pages, 3);
        let p = PaginationDto::new(2, 10, 20);
        assert_eq!(p.total_pages, 2);
    }
}
