//! Prompt construction for the two classification modes.

use imageguard_core::LocationType;
use imageguard_core::reasons::{
    CONTENT_REASONS, PRESENCE_OF_CAR_LICENCES, PRESENCE_OF_FACES, WRONG_LOCATION,
};

/// Build the instruction text sent alongside the image.
///
/// Both prompts share one answer contract: the bare word `valid`, or a JSON
/// list of reason codes.
pub fn build_prompt(location: Option<&LocationType>) -> String {
    match location {
        Some(location) => site_prompt(location),
        None => content_prompt(),
    }
}

fn site_prompt(location: &LocationType) -> String {
    format!(
        "You are reviewing a photo submitted as the {location} of a building. \
         Check three things: whether the image actually shows the {location} of a building, \
         whether it contains an identifiable human face, and whether a vehicle licence plate \
         is readable. \
         If the image shows the {location} of a building with no identifiable face and no \
         readable licence plate, answer exactly: valid \
         Otherwise answer only with a JSON list containing every applicable code: \
         \"{PRESENCE_OF_FACES}\" if an identifiable face is present, \
         \"{PRESENCE_OF_CAR_LICENCES}\" if a licence plate is readable, \
         \"{WRONG_LOCATION}\" if the image does not show the {location} of a building. \
         Example: [\"{PRESENCE_OF_FACES}\", \"{WRONG_LOCATION}\"]. \
         Do not add any other text."
    )
}

fn content_prompt() -> String {
    let codes = CONTENT_REASONS
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You are a content safety reviewer. Check whether this image contains sexual, \
         hateful, harassing, violent, graphic, threatening, or political content. \
         If it contains none of these, answer exactly: valid \
         Otherwise answer only with a JSON list of the applicable codes chosen from: {codes}. \
         Example: [\"{}\"]. \
         Do not add any other text.",
        CONTENT_REASONS[3]
    )
}
