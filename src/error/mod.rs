/*!
 This module contains types of errors that can happen when parsing or
 serializing binary plist data.
*/

pub mod plist;
