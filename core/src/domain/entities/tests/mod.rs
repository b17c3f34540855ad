mod audit_tests;
mod context_tests;
mod identity_tests;
mod verification_record_tests;
