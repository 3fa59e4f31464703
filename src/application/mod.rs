// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// command (inspect, sample or encode a corpus).
//
// Rules for this layer:
//   - No sampling math here (that's Layer 4)
//   - No printing here (that's Layer 1)
//   - No direct file formats (that's Layer 4 and 5)
//   - Only workflow coordination

// Tokenizer + dataset loading shared by every command, and stats
pub mod dataset_use_case;

// Drawing windows from a corpus
pub mod sample_use_case;

// Packing a corpus into .npz archives
pub mod encode_use_case;
