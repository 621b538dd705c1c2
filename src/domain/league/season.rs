use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Season {
    pub id: Uuid,
    pub name: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub is_current: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Season {
    /// Inclusive on both ends, compared on the UTC calendar date.
    pub fn covers(&self, at: chrono::DateTime<chrono::Utc>) -> bool {
        let day = at.date_naive();
        day >= self.start_date && day <= self.end_date
    }
}
