//! Canned conversational prompts driven by the current extraction state.

use chrono::NaiveDate;

use crate::extract::{DetailScan, scan};

/// Produces the agent's next prompt for the given accumulated user text.
///
/// The text is re-scanned field by field and one of six templates is
/// selected from the (city, start, end) knowledge combination. Every
/// combination maps to exactly one response; the agent is never silent.
pub fn respond(text: &str, today: NaiveDate) -> String {
    let DetailScan {
        city,
        start_date,
        end_date,
    } = scan(text, today);
    let has_start = start_date.is_some();
    let has_end = end_date.is_some();

    if city.is_none() && !has_start && !has_end {
        return "I'd be happy to help you plan your trip! Where would you \
                like to go, and when are you planning to travel?"
            .to_owned();
    }

    if let Some(city) = &city {
        if !has_start && !has_end {
            return format!(
                "Great! I see you want to visit {city}. When would you \
                 like to travel? Please tell me your dates."
            );
        }
        if has_start && has_end {
            // Complete extraction is intercepted upstream; this only
            // answers a caller that skipped that check.
            return format!(
                "Perfect! I have your trip to {city}. Let me create your \
                 itinerary!"
            );
        }
        return format!(
            "Almost there! I have {city} and partial dates. Can you \
             confirm both your start and end dates?"
        );
    }

    if has_start || has_end {
        return "I have your travel dates. Which city or destination \
                would you like to visit?"
            .to_owned();
    }

    "Could you tell me the destination city and your complete travel \
     dates (start and end)?"
        .to_owned()
}
