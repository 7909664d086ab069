// All repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` (direct query) and a `&mut Transaction` (atomic operations).

pub mod exam_question;
pub mod exam_score;
pub mod flash_card;
pub mod profile;
pub mod progress;
pub mod report;
