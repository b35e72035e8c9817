pub mod analysis; // Symptom analysis: inference backend + keyword fallback
