/**
 * This module contains all logic for creating and tracking GPU resources.
 */
pub mod ledger;
pub mod mesh;
