pub mod config;
pub mod dose;
pub mod medication;
pub mod schedule;

pub use dose::{DoseHistory, DoseStatus};
pub use medication::{DosageUnit, MealRelation, Medication, MedicationForm};
pub use schedule::{Schedule, Weekdays};
