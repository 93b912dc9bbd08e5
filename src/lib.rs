//! Cairn - exact-algorithm utilities and an append-only decision provenance log
//!
//! This library provides small, self-contained algorithms with well-defined
//! behaviour on degenerate input, plus an in-memory provenance store that
//! persists agent decisions as newline-delimited JSON.
//!
//! | Module | Provides |
//! |--------|----------|
//! | [`sliding_window`] | Max/min of every fixed-size window (monotonic deque) |
//! | [`union_find`] | Union-find forest, redundant-edge detection |
//! | [`edit_distance`] | Levenshtein distance, fuzzy closest match |
//! | [`frequent_items`] | Misra-Gries approximate top-K, Boyer-Moore majority |
//! | [`provenance`] | Append-only decision log with queries and integrity checks |

pub mod edit_distance;
pub mod frequent_items;
pub mod provenance;
pub mod sliding_window;
pub mod union_find;
