// ==============================================================================
// lib.rs - Genotype Tables Library
// ==============================================================================
// Description: Library interface for genotype table modules
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod models;
pub mod frequency;
pub mod parsers;
pub mod genotype_resolver;
pub mod tables;
pub mod styling;
pub mod output;
pub mod validator;
pub mod processor;
