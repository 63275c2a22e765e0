pub mod completion;
pub mod episode;
pub mod quiz;

/// Topics shared by quizzes and episodes so linked pairs read naturally.
pub const TOPICS: [&str; 12] = [
    "Canine parvovirus",
    "Feline asthma",
    "Equine colic",
    "Bovine respiratory disease",
    "Avian influenza",
    "Dental radiography",
    "Exotic anaesthesia",
    "Small animal triage",
    "Antimicrobial stewardship",
    "Canine osteoarthritis",
    "Feline hyperthyroidism",
    "Ruminant nutrition",
];

/// The first `LINKED` topics get an episode pointing at their quiz.
pub const LINKED: usize = 7;

/// Episodes created with no quiz at all.
pub const UNLINKED_EPISODES: usize = 4;
