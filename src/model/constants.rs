// Challenge rules
pub const MAX_CHALLENGE_SPREAD: i32 = 3;
pub const DUPLICATE_COOLDOWN_SECS: u64 = 5 * 60;
// Placeholder ranks start this far above the current bottom of the ladder
pub const TEMP_RANK_OFFSET: i32 = 1000;
pub const MAX_TEMP_RANK_OFFSET: i32 = 1_000_000;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const SAMPLE_PLAYER_NAMES: [&str; 8] = [
    "Alex Johnson",
    "Sarah Williams",
    "Michael Brown",
    "Emily Davis",
    "David Miller",
    "Jessica Wilson",
    "James Moore",
    "Amanda Taylor"
];
