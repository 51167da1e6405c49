/*!
 This module defines common utilities used across the crate.
*/

pub mod dates;
pub mod dump;
