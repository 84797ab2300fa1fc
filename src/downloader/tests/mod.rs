use super::*;
use crate::downloader::test_helpers::{ScriptedEngine, create_test_downloader, wait_for_terminal};
use crate::types::Status;
