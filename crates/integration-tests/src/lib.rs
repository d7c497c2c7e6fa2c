//! Router-level tests for the Chronos API live under `tests/`.
