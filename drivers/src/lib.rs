#![cfg_attr(not(any(test, feature = "sim")), no_std)]

pub mod gpio;
