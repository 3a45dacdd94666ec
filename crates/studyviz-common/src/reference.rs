//! Static improvement-by-system reference table

use serde::{Deserialize, Serialize};

/// Share of participants improved for one physiological system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemImprovement {
    /// Physiological system name
    pub system: String,
    /// Percentage of participants reported as improved (0-100)
    pub improvement_percentage: f64,
    /// Number of participants behind the percentage
    pub sample_size: u32,
}

impl SystemImprovement {
    pub fn new(system: impl Into<String>, improvement_percentage: f64, sample_size: u32) -> Self {
        Self {
            system: system.into(),
            improvement_percentage,
            sample_size,
        }
    }
}

/// The built-in reference table used when no other is configured
pub fn default_system_improvements() -> Vec<SystemImprovement> {
    vec![
        SystemImprovement::new("Neurological", 63.0, 45),
        SystemImprovement::new("Musculoskeletal", 52.0, 25),
        SystemImprovement::new("Systemic", 80.0, 30),
        SystemImprovement::new("Cardiovascular", 80.0, 35),
        SystemImprovement::new("Gastrointestinal", 100.0, 40),
        SystemImprovement::new("Dermatological", 100.0, 20),
        SystemImprovement::new("Genitourinary & reproductive", 73.0, 28),
        SystemImprovement::new("Nonspecific", 82.0, 32),
    ]
}
