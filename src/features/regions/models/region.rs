use sqlx::FromRow;

/// Database model for region
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Region {
    pub id: i32,
    pub name: String,
}
