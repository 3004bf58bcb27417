//! Score a sample knowledge-worker profile and print the nudges

use cap_core::{compute_index, generate_nudges, RawMeasurements};

fn main() {
    let measurements = RawMeasurements {
        indoor_hours: 6.7,
        nature_minutes_this_week: 18.0,
        screen_switches_per_minute: 2.8,
        late_night_screen_minutes: 110.0,
        social_proximity_events: 1.0,
    };

    let score = compute_index(&measurements);
    println!("Misalignment Index: {} -> {}", score.composite, score.verdict);
    for (dimension, value) in score.components.iter() {
        println!("  {dimension}: {value}");
    }

    let nudges = generate_nudges(
        &score,
        measurements.indoor_hours,
        measurements.nature_minutes_this_week,
    );
    for (i, nudge) in nudges.iter().enumerate() {
        println!("\n{}. [Priority {}] {}", i + 1, nudge.priority, nudge.title);
        println!("   {}", nudge.body);
        println!("   -> {}", nudge.suggestion);
        if let Some(value) = nudge.value_usd {
            println!("   Recovery value: ${value}");
        }
    }
}
