// Baseball domain types and pure data shaping: pitch and event lookups,
// Statcast records, frequency tables, count filtering, strike zone averaging,
// and the player register used by the name search.

pub mod count;
pub mod events;
pub mod frequency;
pub mod pitch;
pub mod record;
pub mod register;
pub mod zone;
