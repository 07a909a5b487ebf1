mod startup_tests;
mod support;
