// src/mailboxes/tests/mod.rs


mod pipeline_tests;
