// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! FFI bindings for the browser viewer

pub mod wasm;
