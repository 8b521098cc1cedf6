// --- Grouped layout geometry ---

/// Width reserved for a person card.
pub const PERSON_WIDTH: f64 = 180.0;

/// Height reserved for a person card.
pub const PERSON_HEIGHT: f64 = 170.0;

/// Width reserved for a talk card.
pub const TALK_WIDTH: f64 = 220.0;

/// Approximate height of a talk card.
pub const TALK_HEIGHT: f64 = 70.0;

/// Vertical gap between rows and sections.
pub const VERTICAL_GAP: f64 = 60.0;

/// Horizontal gap between cards in a row.
pub const HORIZONTAL_GAP: f64 = 40.0;

/// Left margin and starting vertical offset of the grouped layout.
pub const MARGIN: f64 = 20.0;

/// Pull the attached talk up so it tucks under the speaker's label.
pub const TALK_TUCK: f64 = 20.0;

/// Columns in the "other people" grid.
pub const PEOPLE_COLUMNS: usize = 5;

/// Columns in the orphan talk grid.
pub const TALK_COLUMNS: usize = 4;

// --- Force layout tuning ---

/// Spring stiffness applied along simulated links.
pub const SPRING_STRENGTH: f64 = 0.3;

/// Weak pull of every node toward the canvas center.
pub const CENTER_STRENGTH: f64 = 0.02;

/// Fraction of velocity lost per step.
pub const VELOCITY_DECAY: f64 = 0.4;

/// Per-step displacement cap.
pub const MAX_STEP: f64 = 50.0;

/// Distance floor for repulsion and spring computations.
pub const MIN_DISTANCE: f64 = 1.0;

/// Largest link rest length the simulation accepts; the seeded spread and
/// the orphan ring both scale with it.
pub const MAX_LINK_DISTANCE: f64 = 1.0e6;

/// Cooling target: alpha reaches this value on the final iteration.
pub const ALPHA_MIN: f64 = 0.001;

/// Vertical offset from a talk's speaker centroid to the talk node.
pub const TALK_OFFSET: f64 = 90.0;

/// Placeholder title for talks referenced without a record.
pub const PLACEHOLDER_TITLE: &str = "Untitled talk";

/// Display name for people without one.
pub const UNNAMED_PERSON: &str = "N/A";
