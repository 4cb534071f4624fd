//! Test suite for xfchat
//!
//! This module organizes all tests

pub mod common;
