//! Integration tests for the palisade router live under `tests/`
