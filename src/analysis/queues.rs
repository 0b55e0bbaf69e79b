/// Games at or under this length (and over zero) were ended by early surrender.
pub const REMAKE_MAX_SECONDS: i64 = 300;

pub const RANKED_QUEUES: [u32; 3] = [420, 440, 1100];

pub const KNOWN_QUEUES: &[(u32, &str)] = &[
    (400, "Normal Draft"),
    (420, "Ranked Solo/Duo"),
    (430, "Normal Blind"),
    (440, "Ranked Flex"),
    (450, "ARAM"),
    (490, "Quickplay"),
    (700, "Clash"),
    (900, "URF"),
    (1100, "Ranked TFT"),
    (1700, "Arena"),
    (1900, "URF"),
];

pub fn is_ranked(queue_id: u32) -> bool {
    RANKED_QUEUES.contains(&queue_id)
}

pub fn queue_name(queue_id: u32) -> String {
    KNOWN_QUEUES
        .iter()
        .find(|(id, _)| *id == queue_id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Queue {}", queue_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_names() {
        assert_eq!(queue_name(420), "Ranked Solo/Duo");
        assert_eq!(queue_name(450), "ARAM");
        assert_eq!(queue_name(9999), "Queue 9999");
    }

    #[test]
    fn test_ranked_set() {
        assert!(is_ranked(420));
        assert!(is_ranked(1100));
        assert!(!is_ranked(450));
    }
}
