pub(crate) mod reader;
pub(crate) mod string;
pub(crate) mod xml;
pub(crate) mod zip;
