//! Trip module - the plan inputs every pipeline stage reads.
//!
//! - `profile` - behavioral profile and trip history from the profile source
//! - `budget` - total budget and its five-way category split
//! - `itinerary` - days, destinations, lodging and transport legs
//! - `preferences` - what the traveler asked for
//! - `realtime` - optional live factors (weather, alerts)

mod budget;
mod itinerary;
mod preferences;
mod profile;
mod realtime;

pub use budget::{AllocationRatios, BudgetBreakdown};
pub use itinerary::{
    Accommodation, AccommodationTier, Day, Destination, GeoPoint, ItinerarySummary, Location,
    TransportMode, Transportation,
};
pub use preferences::{ChangeFlags, TripPreferences};
pub use profile::{HistoricalTrip, SpendRange, UserProfile};
pub use realtime::{RealTimeFactors, WeatherDay};
