// Copyright (c) The schemoose authors.
// Licensed under the MIT License.

mod extractor;
