//! Property-based tests for answer-tree shape guarantees
