pub mod category;
pub mod config;
pub mod dates;
pub mod errors;
pub mod table;

pub use category::{Language, ServiceCategory};
pub use config::{AppConfig, AssistantDirectory, ConfigError, ConfigOverrides, LoadOptions};
pub use dates::{DateRule, WeekClosure, SAME_DAY_REJECTION, SERVICE_DATE_FORMAT};
pub use errors::DomainError;
pub use table::{PriceTable, Selection};
