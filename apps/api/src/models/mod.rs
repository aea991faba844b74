pub mod booking;
pub mod contact;
pub mod employer_profile;
pub mod user;
pub mod waitlist;
