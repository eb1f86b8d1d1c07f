//! Vendor enum code → display name tables.
//!
//! The store reports exercise types, sleep stages and meal types as integer
//! codes. Each table is an immutable slice; anything not listed resolves to
//! [`UNKNOWN`].

pub const UNKNOWN: &str = "Unknown";

pub static EXERCISE_TYPES: &[(i64, &str)] = &[
    (0, "Custom"),
    (1001, "Walking"),
    (1002, "Running"),
    (2001, "Baseball"),
    (2002, "Softball"),
    (2003, "Cricket"),
    (3001, "Golf"),
    (4001, "Handball"),
    (4002, "Basketball"),
    (4003, "Soccer"),
    (4004, "Volleyball"),
    (4005, "Beach volleyball"),
    (5001, "Squash"),
    (6001, "Tennis"),
    (6002, "Badminton"),
    (6003, "Table tennis"),
    (7001, "Ice hockey"),
    (9001, "Rock climbing"),
    (10001, "Push-ups"),
    (10002, "Sit-ups"),
    (10003, "Pull-ups"),
    (10007, "Plank"),
    (11007, "Cycling"),
    (13001, "Hiking"),
    (14001, "Swimming"),
    (15003, "Yoga"),
    (15005, "Pilates"),
    (15006, "Elliptical trainer"),
    (16001, "Skiing"),
    (16002, "Snowboarding"),
];

pub static SLEEP_STAGES: &[(i64, &str)] = &[
    (40001, "Awake"),
    (40002, "Light"),
    (40003, "Deep"),
    (40004, "REM"),
];

pub static MEAL_TYPES: &[(i64, &str)] = &[
    (100001, "Breakfast"),
    (100002, "Lunch"),
    (100003, "Dinner"),
    (100004, "Morning snack"),
    (100005, "Afternoon snack"),
    (100006, "Evening snack"),
];

fn lookup(table: &[(i64, &'static str)], code: i64) -> &'static str {
    table
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN)
}

pub fn exercise_name(code: i64) -> &'static str {
    lookup(EXERCISE_TYPES, code)
}

pub fn sleep_stage_name(code: i64) -> &'static str {
    lookup(SLEEP_STAGES, code)
}

pub fn meal_name(code: i64) -> &'static str {
    lookup(MEAL_TYPES, code)
}
