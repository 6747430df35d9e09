//! Site crawlers.
//!
//! Each crawler holds the selectors and parsing rules of one site and drives
//! a generic [`Browser`](crate::browser::Browser) session.
//!
//! | Site | Module | Entry point |
//! |------|--------|-------------|
//! | Al Jazeera | [`aljazeera`] | [`aljazeera::AlJazeeraCrawler::search_news`] |

pub mod aljazeera;
