//! Chart computation and rendering for the study metadata report

pub mod colormap;
pub mod fonts;
pub mod psychedelic_timeline;
pub mod renderer;
pub mod study_types;
pub mod system_improvements;
pub mod types;

pub use psychedelic_timeline::{PsychedelicTimelineChart, StudyTypeLevel, TimelineData, TimelinePoint};
pub use renderer::*;
pub use study_types::{StudyTypeCount, StudyTypeCounts, StudyTypesChart};
pub use system_improvements::{ImprovementData, SizeLegendEntry, SystemImprovementsChart};
pub use types::*;
