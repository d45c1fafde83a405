//! Instructions sent alongside frames. Each prompt names the exact reply
//! shape that the matching parser in `parse` accepts.

pub fn locate_item(name: &str, slot_count: u32) -> String {
    let last = slot_count.saturating_sub(1);
    format!(
        "Look at this inventory. Find the {name}.\n\
         Inventory slots are numbered 0-{last}, left to right, top to bottom.\n\
         Return ONLY the slot number (0-{last}) of the first {name} you see.\n\
         If it is not found, return -1.\n\
         Respond with just the number, nothing else."
    )
}

pub fn count_slots(description: &str) -> String {
    format!(
        "Look at this inventory.\n\
         Count how many inventory slots contain {description}.\n\
         Return ONLY a number. If there are none, return 0."
    )
}

pub fn binary_condition(question: &str) -> String {
    format!(
        "Look at this game screenshot.\n\
         {question}\n\
         Respond with ONLY 'yes' or 'no'."
    )
}

pub fn grid_origin(slot_count: u32, slots_per_row: u32) -> String {
    format!(
        "Look at this game screenshot and find the inventory: a grid of {slot_count} slots, \
         {slots_per_row} per row.\n\
         Give the pixel position of the top-left corner of the first slot (top-left cell), \
         measured from the top-left corner of this image.\n\
         Reply ONLY with JSON: {{\"x\": <int>, \"y\": <int>}}"
    )
}

pub fn list_items(slot_count: u32) -> String {
    let last = slot_count.saturating_sub(1);
    format!(
        "Analyze this inventory screenshot.\n\
         Identify all items and their positions in the inventory grid.\n\
         Inventory slots are numbered 0-{last}, left to right, top to bottom.\n\
         Reply ONLY with JSON: {{\"items\": [{{\"name\": \"<item name>\", \"slot\": <int>}}]}}"
    )
}

pub const DESCRIBE_SCENE: &str = "Look at this game screenshot.\n\
    Describe what you see in 1-2 sentences.\n\
    What is the player doing? What is visible on screen?";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_name_the_reply_shape() {
        assert!(locate_item("tinderbox", 28).contains("0-27"));
        assert!(locate_item("tinderbox", 28).contains("return -1"));
        assert!(count_slots("logs (any type)").contains("logs (any type)"));
        assert!(binary_condition("Is there a fire?").contains("'yes' or 'no'"));
        assert!(grid_origin(28, 4).contains("{\"x\": <int>, \"y\": <int>}"));
    }
}
