// Library half of the posture CLI, so rendering can be tested without
// spawning the binary.

pub mod report;
