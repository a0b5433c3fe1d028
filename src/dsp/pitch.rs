//! Note-name to frequency conversion (A4 = 440 Hz, equal temperament).

/// Parse a note name (e.g. "C4", "F#3", "Bb5") into a MIDI note number.
pub fn note_to_midi(note: &str) -> Option<i32> {
    let mut chars = note.chars();
    let base = match chars.next()? {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (semitone, octave_str) = match rest.as_bytes().first() {
        Some(b'#') => (base + 1, &rest[1..]),
        Some(b'b') => (base - 1, &rest[1..]),
        _ => (base, rest),
    };
    let octave: i32 = octave_str.parse().ok()?;

    // C4 = 60
    Some((octave + 1) * 12 + semitone)
}

/// `440 * 2^((midi - 69) / 12)`
pub fn midi_to_frequency(midi: i32) -> f64 {
    440.0 * (2.0_f64).powf((midi as f64 - 69.0) / 12.0)
}

pub fn note_to_frequency(note: &str) -> Option<f64> {
    note_to_midi(note).map(midi_to_frequency)
}
