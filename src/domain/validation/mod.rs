//! Field validation for spoken input.

mod address;

pub use address::{
    AddressCheck, AddressComponent, AddressParts, AddressValidator, HeuristicAddressValidator,
    PostalAddress,
};
